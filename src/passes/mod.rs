// The three candidate passes, as `Resolver` methods.
mod filter;
mod satisfy;
mod tie_break;

pub use tie_break::specificity;
