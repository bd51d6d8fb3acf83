use std::{fmt, result};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),
    #[error("runtime error: {0}")]
    Runtime(String),

    #[cfg(feature = "jni-bridge")]
    #[error("jni error: {0}")]
    Jni(#[from] jni::errors::Error),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn config<T: fmt::Display>(inner: T) -> Self {
        Self::Config(inner.to_string())
    }
    pub fn runtime<T: fmt::Display>(inner: T) -> Self {
        Self::Runtime(inner.to_string())
    }
}
