#![no_std]

pub mod engine;
