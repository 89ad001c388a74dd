//! # jsplay
//!
//! Statement segmentation and evaluation for a JavaScript playground.
//!
//! A buffer is split into executable units, one per line on which a statement finishes.
//! Each unit is the buffer prefix up to that line, so running it and keeping its
//! completion value shows what the buffer evaluates to at that point.
//!
//! See [`playground::segmentation`] for the algorithm and [`playground::evaluation`] for
//! how units are run.

pub mod playground;
