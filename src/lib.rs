// Listing Guard: moderation and AI-assist pipeline for campus listings
//
// This is the library root. Each module corresponds to a stage of the
// pipeline or one of the collaborators it hands accepted listings to.

pub mod classifier;
pub mod config;
pub mod gate;
pub mod generator;
pub mod keywords;
pub mod output;
pub mod store;
