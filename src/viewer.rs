// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{BufWriter, Write};
use std::net::TcpStream;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{colors, Color, Framebuffer, Res};

/// Destination for frames produced by [`crate::Ili9225Mirror::flush`].
pub trait FrameSink {
    fn send(&mut self, fb: &Framebuffer) -> Res<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn send(&mut self, fb: &Framebuffer) -> Res<()> {
        S::send(self, fb)
    }
}

// Fan out to every sink. A failing sink does not starve the others, but the
// frame as a whole counts as not delivered.
impl FrameSink for Vec<Box<dyn FrameSink>> {
    fn send(&mut self, fb: &Framebuffer) -> Res<()> {
        let mut failed = 0;
        for sink in self.iter_mut() {
            if let Err(e) = sink.send(fb) {
                log::warn!(error = e.to_string().as_str(); "frame sink failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(format!("{failed} of {} frame sinks failed", self.len()).into());
        }
        Ok(())
    }
}

/// Line-delimited JSON messages understood by the preview viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerMessage {
    Framebuffer {
        width: u16,
        height: u16,
        /// RGB565 pixels, big-endian, base64.
        pixels: String,
    },
    Clear {
        color: Color,
    },
}

impl ViewerMessage {
    pub fn framebuffer(fb: &Framebuffer) -> Self {
        ViewerMessage::Framebuffer {
            width: fb.width(),
            height: fb.height(),
            pixels: STANDARD.encode(fb.to_be_bytes()),
        }
    }

    /// Rebuild a framebuffer from a `framebuffer` message.
    pub fn decode(&self) -> Res<Framebuffer> {
        match self {
            ViewerMessage::Framebuffer {
                width,
                height,
                pixels,
            } => {
                let bytes = STANDARD.decode(pixels)?;
                let expected = 2 * *width as usize * *height as usize;
                if bytes.len() != expected {
                    return Err(format!(
                        "payload has {} bytes, expected {expected}",
                        bytes.len()
                    )
                    .into());
                }
                let mut fb = Framebuffer::new(*width, *height);
                let mut words = bytes.chunks_exact(2).map(|w| u16::from_be_bytes([w[0], w[1]]));
                for y in 0..*height {
                    for x in 0..*width {
                        fb.set(x, y, words.next().unwrap_or(colors::BLACK));
                    }
                }
                Ok(fb)
            }
            ViewerMessage::Clear { color } => {
                Err(format!("clear message (color {color:#06x}) carries no frame").into())
            }
        }
    }
}

/// Writes one JSON message per line to any writer.
pub struct JsonLineSink<W: Write> {
    writer: W,
    frames: usize,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_message(&mut self, msg: &ViewerMessage) -> Res<()> {
        serde_json::to_writer(&mut self.writer, msg)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> FrameSink for JsonLineSink<W> {
    fn send(&mut self, fb: &Framebuffer) -> Res<()> {
        self.write_message(&ViewerMessage::framebuffer(fb))?;
        self.frames += 1;
        Ok(())
    }
}

/// Live preview over TCP.
pub struct TcpViewer {
    addr: String,
    sink: JsonLineSink<BufWriter<TcpStream>>,
}

impl TcpViewer {
    pub fn connect(host: &str, port: u16) -> Res<Self> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;
        let mut sink = JsonLineSink::new(BufWriter::new(stream));
        sink.write_message(&ViewerMessage::Clear {
            color: colors::BLACK,
        })?;
        log::info!(addr = addr.as_str(); "viewer connected");
        Ok(Self { addr, sink })
    }

    pub fn frames(&self) -> usize {
        self.sink.frames()
    }
}

impl FrameSink for TcpViewer {
    fn send(&mut self, fb: &Framebuffer) -> Res<()> {
        self.sink.send(fb).map_err(|e| {
            log::warn!(addr = self.addr.as_str(), error = e.to_string().as_str(); "viewer send failed");
            e
        })
    }
}

/// Writes every frame to the same PNG file.
pub struct PngSink {
    path: PathBuf,
}

impl PngSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSink for PngSink {
    fn send(&mut self, fb: &Framebuffer) -> Res<()> {
        fb.save_png(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::rc::Rc;

    #[test]
    fn test_framebuffer_message() -> Res<()> {
        let mut fb = Framebuffer::new(2, 1);
        fb.set(0, 0, colors::RED);
        fb.set(1, 0, colors::GREEN);
        let json = serde_json::to_string(&ViewerMessage::framebuffer(&fb))?;
        assert_eq!(
            json,
            r#"{"type":"framebuffer","width":2,"height":1,"pixels":"+AAH4A=="}"#
        );
        let msg: ViewerMessage = serde_json::from_str(&json)?;
        assert_eq!(msg.decode()?, fb);
        Ok(())
    }

    #[test]
    fn test_clear_message() -> Res<()> {
        let json = serde_json::to_string(&ViewerMessage::Clear { color: 0 })?;
        assert_eq!(json, r#"{"type":"clear","color":0}"#);
        assert!(ViewerMessage::Clear { color: 0 }.decode().is_err());
        Ok(())
    }

    #[test]
    fn test_truncated_payload() {
        let msg = ViewerMessage::Framebuffer {
            width: 4,
            height: 4,
            pixels: STANDARD.encode([0u8; 6]),
        };
        assert!(msg.decode().is_err());
    }

    #[test]
    fn test_json_line_sink() -> Res<()> {
        let mut sink = JsonLineSink::new(Vec::new());
        let fb = Framebuffer::new(3, 3);
        sink.send(&fb)?;
        sink.send(&fb)?;
        assert_eq!(sink.frames(), 2);
        let out = String::from_utf8(sink.into_inner())?;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(r#"{"type":"framebuffer","width":3,"height":3"#));
        assert!(out.ends_with('\n'));
        Ok(())
    }

    #[test]
    fn test_tcp_viewer() -> Res<()> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let mut viewer = TcpViewer::connect("127.0.0.1", port)?;
        let (stream, _) = listener.accept()?;

        let mut fb = Framebuffer::new(2, 2);
        fb.set(1, 1, colors::BLUE);
        viewer.send(&fb)?;
        assert_eq!(viewer.frames(), 1);

        let mut lines = BufReader::new(stream).lines();
        let first: ViewerMessage = serde_json::from_str(&lines.next().unwrap()?)?;
        assert_eq!(first, ViewerMessage::Clear { color: 0 });
        let second: ViewerMessage = serde_json::from_str(&lines.next().unwrap()?)?;
        assert_eq!(second.decode()?, fb);
        Ok(())
    }

    #[test]
    fn test_png_sink() -> Res<()> {
        let path = std::env::temp_dir().join(format!("ili9225-sink-{}.png", std::process::id()));
        let mut fb = Framebuffer::new(4, 2);
        fb.set(3, 1, colors::WHITE);
        PngSink::new(&path).send(&fb)?;
        let image = lodepng::decode32_file(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.buffer[7], colors::to_rgba(colors::WHITE));
        assert_eq!(image.buffer[0], colors::to_rgba(colors::BLACK));
        Ok(())
    }

    #[test]
    fn test_sink_fan_out() -> Res<()> {
        struct Failing;
        impl FrameSink for Failing {
            fn send(&mut self, _: &Framebuffer) -> Res<()> {
                Err("broken pipe".into())
            }
        }
        struct Counting(Rc<Cell<usize>>);
        impl FrameSink for Counting {
            fn send(&mut self, _: &Framebuffer) -> Res<()> {
                self.0.set(self.0.get() + 1);
                Ok(())
            }
        }

        let frames = Rc::new(Cell::new(0));
        let mut sinks: Vec<Box<dyn FrameSink>> = vec![
            Box::new(Failing),
            Box::new(Counting(frames.clone())),
            Box::new(Failing),
        ];
        let err = sinks.send(&Framebuffer::new(1, 1)).unwrap_err();
        assert_eq!(err.to_string(), "2 of 3 frame sinks failed");
        assert_eq!(frames.get(), 1);

        let mut healthy: Vec<Box<dyn FrameSink>> = vec![Box::new(Counting(frames.clone()))];
        healthy.send(&Framebuffer::new(1, 1))?;
        assert_eq!(frames.get(), 2);
        Ok(())
    }
}
