// Scripted smoke run: the fixed create/get(/delete) sequence, printing each
// raw response body as soon as it arrives.

use crate::api::{ApiClient, CreateImage, DeleteImage, ImagePath};
use crate::config::Config;
use anyhow::Result;
use std::io::Write;

/// One request of the smoke sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    Get,
    Delete,
}

/// Steps in run order. Delete is opt-in since it removes what create made.
pub fn steps(with_delete: bool) -> Vec<Step> {
    let mut steps = vec![Step::Create, Step::Get];
    if with_delete {
        steps.push(Step::Delete);
    }
    steps
}

/// Run `steps` one after another against `api`, writing each body plus a
/// newline to `out`. The first failure stops the run.
pub fn run_sequence<W: Write>(
    api: &ApiClient,
    config: &Config,
    steps: &[Step],
    out: &mut W,
) -> Result<()> {
    for step in steps {
        let res = match step {
            Step::Create => api.create(&CreateImage::from_image_id(
                &config.user_id,
                &config.image_id,
                config.height,
                config.width,
            ))?,
            Step::Get => api.get(&ImagePath::Image(
                config.user_id.clone(),
                config.image_id.clone(),
            ))?,
            Step::Delete => api.delete(&DeleteImage::image(&config.user_id, &config.image_id))?,
        };
        writeln!(out, "{}", res.text())?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_create_then_get() {
        assert_eq!(steps(false), vec![Step::Create, Step::Get]);
        assert_eq!(steps(true), vec![Step::Create, Step::Get, Step::Delete]);
    }
}
