use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::image_buf::ImageBuf;

/// Create a single-slot hand-off channel carrying exactly one image.
///
/// Both ends are consumed by use: `send` moves the image in and retires the
/// sender, `recv` moves it out. A receiver whose sender was dropped without
/// sending observes `None`.
pub fn handoff() -> (HandoffSender, HandoffReceiver) {
    let (tx, rx) = mpsc::sync_channel(1);
    (HandoffSender { tx }, HandoffReceiver { rx })
}

pub struct HandoffSender {
    tx: SyncSender<ImageBuf>,
}

impl HandoffSender {
    /// Publish the image and close the channel.
    ///
    /// Never blocks: the slot is empty because this is the only send.
    /// Returns the image if the receiver is gone.
    pub fn send(self, image: ImageBuf) -> Result<(), ImageBuf> {
        self.tx.send(image).map_err(|err| err.0)
    }
}

pub struct HandoffReceiver {
    rx: Receiver<ImageBuf>,
}

impl HandoffReceiver {
    /// Block until the image arrives or the sender is dropped.
    pub fn recv(self) -> Option<ImageBuf> {
        self.rx.recv().ok()
    }
}
