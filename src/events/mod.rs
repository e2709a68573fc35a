//! # Events Module
//!
//! Progress reporting for the gallery tools.
//!
//! The core library emits events through a channel; the CLI subscribes on
//! a helper thread and prints them as they arrive.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Rename(RenameEvent::Renamed { from, to }) = event {
//!             println!("{} -> {}", from, to);
//!         }
//!     }
//! });
//!
//! renamer.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
