/*!
# E-Cell Startup Submission Portal

A small web portal for a college entrepreneurship cell, built in Rust.
Students register, log in and submit one startup idea through a validated
form; a confirmation page shows the stored submission.

## Architecture

The portal is rendered on the server:

### Pages
- **Register** - account fields with college email / roll number / phone checks
- **Login** - identifier and password, issues a session cookie
- **Dashboard** - startup idea form with live progress and word count
- **Confirmation** - submission id, review status and E-Cell links

### Backend Layer
- **Technologies**: Rust, axum, handlebars
- **Core Components**:
  - Validation - regex field rules and word counting
  - Form State - progress percentage and the submit gate
  - Session Store - `user` and `submission` JSON values per browser session
  - Authenticator - demo login or argon2-backed accounts

### Data Persistence Layer
- In-memory key-value store, or a JSON file mirror of it
- Accounts file with Argon2 password hashes (accounts mode only)

## Modules

- **model**: User, registration/login forms, submission form and record
- **validation**: Field patterns, word count and error collection
- **dashboard**: Progress, submit gate and submission checks
- **confirmation**: Submission id and confirmation view model
- **store**: Scoped key-value store backends
- **session**: Session and submission repositories over a store
- **auth**: Authenticator trait with demo and account implementations
- **config**: Environment-driven configuration
- **error**: Error types
- **pages**: Handlebars page rendering (web feature)
- **app**: Routing, guards and handlers (web feature)

## Routes

- `/register`, `/login`, `/logout` - account flow
- `/dashboard` - submission form (requires a session)
- `/confirmation` - submission summary (requires a session and a submission)
- `/api/progress` - live form state for the dashboard script
- `/health` - liveness probe
*/

pub mod auth;
pub mod config;
pub mod confirmation;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod validation;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod pages;

/// Re-export the most used types to make them easier to reach
pub use auth::*;
pub use config::*;
pub use model::*;
pub use session::*;
pub use store::*;
