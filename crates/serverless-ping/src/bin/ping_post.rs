//! Worker process for the `ping_post` function
use serverless_ping_sdk::handler_loop;

handler_loop!(serverless_ping::handler::ping_post);
