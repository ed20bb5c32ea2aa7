//! App: ties the renderer to a terminal writer and an event loop.
//!
//! [`App`] owns a [`Renderer`] and a [`FrameWriter`]; every commit is
//! forwarded to the writer, optionally rate-limited by a [`Throttle`] that
//! keeps the newest skipped frame pending until [`App::tick`]. The sink is
//! generic so tests can render into a byte buffer.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::element::Element;
use crate::error::RenderError;
use crate::input::{DispatchQueue, Event};
use crate::reconciler::Renderer;
use crate::render::writer::{FrameWriter, WriteMode};
use crate::throttle::Throttle;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Terminal width in cells. Detected from the terminal when unset.
    pub width: Option<u16>,
    /// How frames replace each other on screen.
    pub mode: WriteMode,
    /// Minimum interval between frame writes. Unset writes every commit.
    pub throttle: Option<Duration>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed terminal width (builder).
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Write mode (builder).
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Frame write rate limit (builder).
    pub fn with_throttle(mut self, interval: Duration) -> Self {
        self.throttle = Some(interval);
        self
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The application shell: renderer, writer, throttle, and event plumbing.
pub struct App<W: Write> {
    renderer: Renderer,
    writer: Rc<RefCell<FrameWriter<W>>>,
    throttle: Option<Rc<RefCell<Throttle>>>,
    /// Newest frame skipped by the throttle, written on the next tick.
    pending: Rc<RefCell<Option<String>>>,
    handler: Option<Box<dyn FnMut(Event)>>,
    queue: DispatchQueue,
}

impl App<io::BufWriter<io::Stdout>> {
    /// An app writing to stdout, width detected from the terminal.
    pub fn stdout(mut config: AppConfig) -> Self {
        if config.width.is_none() {
            let (width, _) = crossterm::terminal::size().unwrap_or((80, 24));
            config.width = Some(width);
        }
        Self::with_sink(config, io::BufWriter::new(io::stdout()))
    }
}

impl<W: Write + 'static> App<W> {
    /// An app writing frames into `sink`.
    pub fn with_sink(config: AppConfig, sink: W) -> Self {
        let width = config.width.unwrap_or(80);
        let mut renderer = Renderer::new(width);
        let writer = Rc::new(RefCell::new(FrameWriter::new(sink, config.mode)));
        let throttle = config
            .throttle
            .map(|interval| Rc::new(RefCell::new(Throttle::new(interval))));
        let pending: Rc<RefCell<Option<String>>> = Rc::default();

        let commit_writer = writer.clone();
        let commit_throttle = throttle.clone();
        let commit_pending = pending.clone();
        renderer.on_commit(move |frame, _| {
            let admitted = match &commit_throttle {
                Some(t) => t.borrow_mut().acquire(Instant::now()),
                None => true,
            };
            if admitted {
                // Write errors surface on the next explicit writer call.
                let _ = commit_writer.borrow_mut().render(frame);
                *commit_pending.borrow_mut() = None;
            } else {
                *commit_pending.borrow_mut() = Some(frame.to_string());
            }
        });

        Self {
            renderer,
            writer,
            throttle,
            pending,
            handler: None,
            queue: DispatchQueue::new(),
        }
    }

    /// Render `element` as the root; the frame goes to the writer.
    pub fn render(&mut self, element: Element) -> Result<(), RenderError> {
        self.renderer.render(element)
    }

    /// Coalesce the state updates made inside `f` into one commit.
    pub fn batch(&mut self, f: impl FnOnce()) {
        self.renderer.batch(f);
    }

    /// Register the input event handler.
    pub fn on_event(&mut self, f: impl FnMut(Event) + 'static) {
        self.handler = Some(Box::new(f));
    }

    /// Deliver one event: resizes re-render at the new width, then the
    /// handler runs with its state updates batched into one commit.
    pub fn dispatch(&mut self, event: Event) {
        if let Event::Resize { width, .. } = event {
            self.renderer.resize(width);
        }
        if let Some(handler) = self.handler.as_mut() {
            self.renderer.batch(|| handler(event));
        }
    }

    /// A cloneable queue for feeding events from another thread.
    pub fn queue(&self) -> DispatchQueue {
        self.queue.clone()
    }

    /// Dispatch everything queued since the last pump.
    pub fn pump(&mut self) {
        for event in self.queue.drain() {
            self.dispatch(event);
        }
    }

    /// Periodic housekeeping: pump queued events and write the pending
    /// frame once the throttle interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> io::Result<()> {
        self.pump();
        let frame = self.pending.borrow_mut().take();
        if let Some(frame) = frame {
            let admitted = match &self.throttle {
                Some(t) => t.borrow_mut().acquire(now),
                None => true,
            };
            if admitted {
                self.writer.borrow_mut().render(&frame)?;
            } else {
                *self.pending.borrow_mut() = Some(frame);
            }
        }
        Ok(())
    }

    /// The last committed frame.
    pub fn frame(&self) -> String {
        self.renderer.frame()
    }

    pub fn line_count(&self) -> usize {
        self.renderer.line_count()
    }

    /// Erase the frame from the terminal (state is kept).
    pub fn clear(&mut self) -> io::Result<()> {
        self.writer.borrow_mut().clear()
    }

    /// Error stored by a setter-triggered render cycle, if any.
    pub fn take_error(&mut self) -> Option<RenderError> {
        self.renderer.take_error()
    }

    /// Tear down the tree, leave the last frame on screen, and restore the
    /// cursor.
    pub fn unmount(&mut self) -> io::Result<()> {
        self.renderer.unmount();
        self.writer.borrow_mut().done()
    }
}
