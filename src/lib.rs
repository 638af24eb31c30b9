/*!
 * # EduArt Aligner - bilingual script alignment
 *
 * A Rust library and HTTP service that pairs two parallel scripts (a source
 * language text and its translation) line by line for a synchronized
 * bilingual player.
 *
 * ## Features
 *
 * - Positional alignment: line N of the source is paired with line N of the
 *   target, blank lines are ignored and the shorter side is padded
 * - JSON request boundary with explicit validation
 * - HTTP endpoint (`POST /api/align`) with a permissive, configurable
 *   cross-origin policy
 * - Offline alignment of files from the command line
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `aligner`: Line normalization and positional alignment
 * - `api`: Request decoding, validation and response payloads
 * - `cors`: Cross-origin policy
 * - `http`: HTTP/1.1 request parsing and response encoding
 * - `server`: Connection handling and routing
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod aligner;
pub mod api;
pub mod app_config;
pub mod cors;
pub mod errors;
pub mod file_utils;
pub mod http;
pub mod server;

// Re-export main types for easier usage
pub use aligner::{align, normalize_lines, AlignedRecord, AlignmentStats};
pub use api::{AlignRequest, AlignResponse};
pub use app_config::Config;
pub use cors::CorsPolicy;
pub use errors::{HttpError, RequestError};
pub use server::{AlignServer, AlignService};
