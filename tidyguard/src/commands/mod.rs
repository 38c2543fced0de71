// tidyguard/src/commands/mod.rs

pub mod check;
