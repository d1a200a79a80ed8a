use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::pipeline::handoff::{HandoffReceiver, HandoffSender};
use crate::pipeline::stage::Stage;

/// Run one stage on a worker thread.
///
/// Takes the in-flight image from `input`, applies `stage`, and publishes the
/// result on `output`. Publishing is the completion signal: it happens once,
/// after the output is fully computed, and retires the channel. On error
/// nothing is published and `output` is dropped, which the orchestrator sees
/// as a closed hand-off.
///
/// Panics if the image is empty; stages are only defined over non-empty
/// images.
pub fn run_stage(stage: &dyn Stage, input: HandoffReceiver, output: HandoffSender) -> Result<()> {
    let image = input
        .recv()
        .context("input hand-off closed before an image arrived")?;
    assert!(
        !image.is_empty(),
        "stage `{}` received an empty {}x{} image",
        stage.name(),
        image.width,
        image.height
    );

    debug!(
        stage = stage.name(),
        width = image.width,
        height = image.height,
        "stage started"
    );
    let result = stage.apply(image)?;

    output
        .send(result)
        .map_err(|_| anyhow!("output hand-off receiver dropped"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_buf::ImageBuf;
    use crate::pipeline::handoff::handoff;
    use crate::pipeline::stages::Grayscale;

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn apply(&self, _input: ImageBuf) -> Result<ImageBuf> {
            anyhow::bail!("boom")
        }
    }

    #[test]
    fn publishes_transformed_image() {
        let (in_tx, in_rx) = handoff();
        let (out_tx, out_rx) = handoff();
        in_tx.send(ImageBuf::filled(2, 2, [255, 0, 0, 255])).unwrap();
        run_stage(&Grayscale, in_rx, out_tx).unwrap();
        let out = out_rx.recv().unwrap();
        assert_eq!(out.pixel(0, 0), [76, 76, 76, 255]);
    }

    #[test]
    fn stage_error_closes_output_without_value() {
        let (in_tx, in_rx) = handoff();
        let (out_tx, out_rx) = handoff();
        in_tx.send(ImageBuf::new(1, 1)).unwrap();
        let err = run_stage(&Failing, in_rx, out_tx).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(out_rx.recv().is_none());
    }

    #[test]
    fn closed_input_is_an_error() {
        let (in_tx, in_rx) = handoff();
        let (out_tx, out_rx) = handoff();
        drop(in_tx);
        assert!(run_stage(&Grayscale, in_rx, out_tx).is_err());
        assert!(out_rx.recv().is_none());
    }

    #[test]
    fn dropped_output_receiver_is_an_error() {
        let (in_tx, in_rx) = handoff();
        let (out_tx, out_rx) = handoff();
        drop(out_rx);
        in_tx.send(ImageBuf::new(1, 1)).unwrap();
        assert!(run_stage(&Grayscale, in_rx, out_tx).is_err());
    }

    #[test]
    #[should_panic(expected = "received an empty")]
    fn empty_image_panics() {
        let (in_tx, in_rx) = handoff();
        let (out_tx, _out_rx) = handoff();
        in_tx.send(ImageBuf::new(0, 3)).unwrap();
        let _ = run_stage(&Grayscale, in_rx, out_tx);
    }
}
