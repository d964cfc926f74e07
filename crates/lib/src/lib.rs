//! textfn core library: function descriptors, input forms, submission tracking and the
//! playground API client, shared by the CLI and desktop applications.

pub mod api;
pub mod catalog;
pub mod config;
pub mod definition;
pub mod error;
pub mod form;
pub mod init;
pub mod logs;
pub mod submission;
