pub mod assignment;
pub mod dispatch;
pub mod lifecycle;
pub mod queue;
pub mod scoring;
