use mongorepo::errors::{ErrorKind, RepositoryError, RepositoryResult};
use mongorepo::repository::{AsyncObjectRepository, Entity, ObjectRepository};
use mongorepo::{RepositoryBuilder, RepositoryConfig};
use std::backtrace::Backtrace;
use std::future::Future;
use std::time::{Duration, Instant};
use std::{env, thread};

/// Environment variable holding the MongoDB deployment used by the ignored tests,
/// e.g. `mongodb://localhost:27017`. Each test runs in a fresh database.
pub const TEST_URL_VAR: &str = "MONGOREPO_TEST_URL";

/// Runs a test with retry logic and error handling.
///
/// `after` runs whether the test passed or failed, so databases created by `before`
/// are always dropped.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> RepositoryResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> RepositoryResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> RepositoryResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    eprintln!("Backtrace:\n{}", bt);
                }
                e
            }
            Err(panic_err) => {
                if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Panic: {}", s)
                } else {
                    "Panic: unknown payload".to_string()
                }
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// Generates one `#[test]` per scenario for the in-memory backend and an ignored one
/// for MongoDB.
///
/// ```rust,ignore
/// fn add_assigns_id(ctx: TestContext) -> RepositoryResult<()> { ... }
///
/// on_both_backends!(add_assigns_id, update_replaces);
/// ```
#[macro_export]
macro_rules! on_both_backends {
    ($($scenario:ident),* $(,)?) => {
        mod in_memory {
            $(
                #[test]
                fn $scenario() {
                    $crate::test_util::run_test(
                        $crate::test_util::create_memory_context,
                        super::$scenario,
                        $crate::test_util::cleanup,
                    )
                }
            )*
        }

        mod mongo {
            $(
                #[test]
                #[ignore = "requires MONGOREPO_TEST_URL"]
                fn $scenario() {
                    $crate::test_util::run_test(
                        $crate::test_util::create_mongo_context,
                        super::$scenario,
                        $crate::test_util::cleanup,
                    )
                }
            )*
        }
    };
}

#[derive(Clone)]
pub struct TestContext {
    config: RepositoryConfig,
    connection_string: Option<String>,
}

impl TestContext {
    pub fn new(config: RepositoryConfig, connection_string: Option<String>) -> Self {
        Self {
            config,
            connection_string,
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn is_in_memory(&self) -> bool {
        self.config.is_in_memory()
    }

    /// Connection string of the per-test database, `None` for the in-memory backend.
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    pub fn repository<T: Entity>(&self) -> RepositoryResult<ObjectRepository<T>> {
        self.config.open::<T>()
    }

    pub async fn async_repository<T: Entity>(&self) -> RepositoryResult<AsyncObjectRepository<T>> {
        self.config.open_async::<T>().await
    }
}

pub fn create_memory_context() -> RepositoryResult<TestContext> {
    let config = RepositoryBuilder::new().in_memory().build()?;
    Ok(TestContext::new(config, None))
}

pub fn create_mongo_context() -> RepositoryResult<TestContext> {
    let base_url = env::var(TEST_URL_VAR).map_err(|err| {
        RepositoryError::new_with_cause(
            &format!("{} is not set", TEST_URL_VAR),
            ErrorKind::ConfigurationError,
            err,
        )
    })?;

    let connection_string = with_database(&base_url, &random_database_name());
    let config = RepositoryBuilder::new().mongodb(&connection_string).build()?;
    Ok(TestContext::new(config, Some(connection_string)))
}

/// Drops the per-test database. Nothing to do for the in-memory backend.
pub fn cleanup(ctx: TestContext) -> RepositoryResult<()> {
    if let Some(connection_string) = ctx.connection_string() {
        let client = mongodb::sync::Client::with_uri_str(connection_string)?;
        if let Some(database) = client.default_database() {
            database.drop().run()?;
        }
    }
    Ok(())
}

pub fn random_database_name() -> String {
    format!("mongorepo_test_{}", uuid::Uuid::new_v4().simple())
}

/// Inserts the database name into a connection string that names none.
pub fn with_database(base_url: &str, database: &str) -> String {
    let (address, options) = match base_url.split_once('?') {
        Some((address, options)) => (address, format!("?{}", options)),
        None => (base_url, String::new()),
    };
    format!("{}/{}{}", address.trim_end_matches('/'), database, options)
}

/// Runs an async scenario on a single-threaded tokio runtime.
pub fn block_on<F>(future: F) -> RepositoryResult<()>
where
    F: Future<Output = RepositoryResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            RepositoryError::new_with_cause(
                "Failed to start the test runtime",
                ErrorKind::InternalError,
                err,
            )
        })?;
    runtime.block_on(future)
}
