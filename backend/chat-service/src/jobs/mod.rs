pub mod presence_sweeper;

pub use presence_sweeper::spawn_presence_sweeper;
