//! Test suites for the worker bootstrap and request loop.

mod support;
