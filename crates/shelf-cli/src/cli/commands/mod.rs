pub mod browse;
mod dispatch;

pub use dispatch::dispatch;
