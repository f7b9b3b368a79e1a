// Command line and configuration
pub mod cli;
pub mod config;

// Topic workspaces and domain classification
pub mod domain;
pub mod workspace;

// Prompt templates
pub mod prompts;

// Streaming output and tool progress
pub mod console;
pub mod driver;
pub mod tools;
pub mod tracker;

// Operations and the interactive prompt
pub mod commands;
pub mod input;
pub mod repl;
pub mod research;

// Claude Code adapter
pub mod runtime;
