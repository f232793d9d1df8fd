pub mod commands;
pub mod copy;
pub mod fallback;
pub mod http;
pub mod lock;
pub mod package;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod runtime;
