// Application layer: request handlers sitting between a transport and the core run.

pub mod handlers;
