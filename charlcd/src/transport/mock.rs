use crate::transport::Transport;
use crate::{LcdError, LcdResult, RegisterSelect, TransportKind};

/// A decoded transfer, as the display would see it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    Command(u8),
    Data(u8),
}

/// Records every frame written to it, optionally failing after a number of frames.
#[derive(Debug)]
pub struct RecordingTransport {
    pub kind: TransportKind,
    pub frames: Vec<Vec<u8>>,
    pub fail_after: Option<usize>,
}

impl RecordingTransport {
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            frames: Vec::new(),
            fail_after: None,
        }
    }

    pub fn failing_after(kind: TransportKind, frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::new(kind)
        }
    }

    /// Decodes the recorded frames back into commands and data bytes.
    pub fn events(&self) -> Vec<Event> {
        let command = self.kind.control_byte(RegisterSelect::Command);
        let data = self.kind.control_byte(RegisterSelect::Data);
        self.frames
            .iter()
            .map(|frame| match frame.as_slice() {
                [control, byte] if Some(*control) == command => Event::Command(*byte),
                [control, byte] if Some(*control) == data => Event::Data(*byte),
                [byte] if data.is_none() => Event::Data(*byte),
                other => panic!("unexpected frame {other:02X?}"),
            })
            .collect()
    }

    fn record(&mut self, frame: Vec<u8>) -> LcdResult<()> {
        if self.fail_after.is_some_and(|limit| self.frames.len() >= limit) {
            return Err(LcdError::Transport {
                bus: self.kind,
                message: "NoAcknowledge".into(),
            });
        }
        self.frames.push(frame);
        Ok(())
    }
}

impl Transport for RecordingTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn write(&mut self, bytes: &[u8]) -> LcdResult<()> {
        self.record(bytes.to_vec())
    }

    fn write_register(&mut self, register: u8, bytes: &[u8]) -> LcdResult<()> {
        let mut frame = vec![register];
        frame.extend_from_slice(bytes);
        self.record(frame)
    }
}
