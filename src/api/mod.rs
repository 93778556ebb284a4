pub mod cli;
pub mod http;

pub use cli::{Cli, CliError, CliHandler, Commands};
pub use http::{
    router, ApiError, ApiServer, AppState, ErrorResponse, PaginationQuery,
    find_transaction, get_all_blocks, get_block_paginate, get_infor_transaction, get_transaction_paginate,
};
