mod common;
mod legacy;
