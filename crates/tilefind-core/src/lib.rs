//! tilefind core: find the LiDAR point-cloud tiles covering an area of
//! interest and download them.
//!
//! - [`aoi`]: center point + area → bbox → catalog query → tile list
//! - [`downloader`]: sequential, retrying, cancelable batch downloads with
//!   ordered progress events

pub mod config;
pub mod logging;

pub mod aoi;
pub mod catalog;
pub mod control;
pub mod downloader;
pub mod error;
pub mod listfile;
pub mod progress;
pub mod retry;
pub mod url_model;

pub use error::AoiError;
