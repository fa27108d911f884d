//! Reduced-size banner cache
//!
//! Keeps low-resolution, render-ready copies of game banner images on
//! disk so selection screens can show every banner without decoding
//! full-size art. Cache entries are preprocessed offline (color key,
//! de-rotation of diagonal banners, box-filter downscale, dither or
//! palettization) and uploaded through the [`texture::Renderer`] trait at
//! display time.
//!
//! The entry point is [`cache::BannerCache`].

pub mod cache;
pub mod config;
pub mod errors;
pub mod hashing;
pub mod surface;
pub mod texture;
