//! Skill-based scoring for candidate assessments.
//!
//! A submission carries a completion time, a pre-graded main question and a
//! set of written answers. Written answers are judged by an LLM rubric once
//! each; the resulting criterion judgments feed every configured skill.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
