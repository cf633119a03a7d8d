use std::sync::Once;

static INIT: Once = Once::new();

/// Route test logs through tracing when `RUST_LOG` asks for them.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
