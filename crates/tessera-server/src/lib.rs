//! Admin HTTP module for tessera.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/admin` | Health check, replies `GOOD` |
//! | GET | `/v1/admin/loglevel` | Current log level |
//! | POST | `/v1/admin/loglevel` | Change log level (`{"level": "debug"}`) |
//! | GET | `/v1/store` | Index names |
//! | GET | `/v1/store/:index` | Database names of an index |
//! | GET | `/v1/store/:index/:database` | Entry keys of a database |

pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use error::{ServerError, ServerResult};
pub use router::{build_router, AdminState};
pub use server::AdminServer;
