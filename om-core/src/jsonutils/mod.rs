mod canonical;
mod patch;

pub use canonical::{
    canonical_string,
    sort_canonical,
};
pub use patch::add_at;
