//! Ordered text output with an explicit end-of-message marker.
//!
//! Producers send `Chunk`s followed by `End`; exactly one printer consumes
//! them and terminates each message with a newline.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Chunk(String),
    End,
}

pub fn channel() -> (Sender<OutputEvent>, Receiver<OutputEvent>) {
    mpsc::channel()
}

/// Send one complete message: its chunks, then `End`.
pub fn emit<I, S>(tx: &Sender<OutputEvent>, chunks: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for chunk in chunks {
        tx.send(OutputEvent::Chunk(chunk.into()))?;
    }
    tx.send(OutputEvent::End)?;
    Ok(())
}

/// Drain events into `out` until every sender is dropped; hands the writer back.
pub fn spawn_printer<W>(rx: Receiver<OutputEvent>, mut out: W) -> JoinHandle<io::Result<W>>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        for event in rx {
            match event {
                OutputEvent::Chunk(text) => write!(out, "{text}")?,
                OutputEvent::End => {
                    writeln!(out)?;
                    out.flush()?;
                }
            }
        }
        Ok(out)
    })
}
