//! Page types and on-page layouts.
//!
//! - [`Page`] - the raw 4KB frame contents
//! - [`codec`] - fixed-width little-endian field encoding
//! - the three extendible hashing layouts: [`HashHeaderPage`],
//!   [`HashDirectoryPage`], [`HashBucketPage`]

pub mod codec;
mod hash_bucket_page;
mod hash_directory_page;
mod hash_header_page;
#[allow(clippy::module_inception)]
mod page;

pub use codec::OnPage;
pub use hash_bucket_page::HashBucketPage;
pub use hash_directory_page::{HashDirectoryPage, HASH_DIRECTORY_MAX_DEPTH};
pub use hash_header_page::{HashHeaderPage, HASH_HEADER_MAX_DEPTH};
pub use page::Page;
