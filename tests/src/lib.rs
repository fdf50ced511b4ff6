mod discovery;
mod support;
mod upload;
