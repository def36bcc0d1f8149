// Copyright (c) 2026 tagnet contributors
// SPDX-License-Identifier: AGPL-3.0

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub mod bailiff_client;
pub mod registry;

pub use bailiff_client::HttpBailiffClient;
pub use registry::{HttpRegistryClient, InMemoryRegistry};

/// Everything but RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode a registry name or property key as one URL path segment.
pub(crate) fn path_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}
