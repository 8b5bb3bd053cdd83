//! Integration tests driving the Kura middlewares through salvo's test client.

mod dpop;
mod helpers;
mod replay_pg;
mod wac;
