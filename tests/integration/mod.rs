//! Integration tests driving the release-progress binary

mod helpers;
mod test_collect;
mod test_validate;
