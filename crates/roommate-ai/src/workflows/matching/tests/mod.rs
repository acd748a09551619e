mod common;
mod compatibility;
mod hydration;
