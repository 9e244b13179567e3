mod assistants;
mod common;
mod evaluation;
