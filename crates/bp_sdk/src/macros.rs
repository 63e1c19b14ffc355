//! Macros for opening scoped blocks with callsite capture.

/// Open a block that lasts until the end of the enclosing scope, capturing
/// `file!()`/`line!()` at the callsite.
///
/// ```
/// # let session = bp_sdk::ProfilerSessionBuilder::new("doc").enabled(true).buffered();
/// {
///     bp_sdk::profile_block!(session, "physics");
///     // ... traced work ...
/// }
/// # assert_eq!(session.drain_backlog().len(), 1);
/// ```
///
/// Color and flags are optional trailing arguments:
///
/// ```
/// # use bp_sdk::{Color, StatusFlags};
/// # let session = bp_sdk::ProfilerSessionBuilder::new("doc").enabled(true).buffered();
/// bp_sdk::profile_block!(session, "render", Color::BLUE);
/// bp_sdk::profile_block!(session, "io", Color::GREEN, StatusFlags::ON_WITHOUT_CHILDREN);
/// ```
#[macro_export]
macro_rules! profile_block {
    ($session:expr, $name:expr) => {
        $crate::profile_block!($session, $name, $crate::Color::DEFAULT);
    };
    ($session:expr, $name:expr, $color:expr) => {
        $crate::profile_block!($session, $name, $color, $crate::StatusFlags::ON);
    };
    ($session:expr, $name:expr, $color:expr, $flags:expr) => {
        let _block_scope = $session.scope($name, file!(), line!(), $color, $flags);
    };
}

/// Like [`profile_block!`], with the enclosing function's name as the block
/// name.
#[macro_export]
macro_rules! profile_function {
    ($session:expr) => {
        $crate::profile_block!($session, $crate::current_function_name!());
    };
    ($session:expr, $color:expr) => {
        $crate::profile_block!($session, $crate::current_function_name!(), $color);
    };
}

/// The name of the function this is invoked in, without the trailing
/// `::{{closure}}` noise.
#[doc(hidden)]
#[macro_export]
macro_rules! current_function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // `name` is e.g. `my_crate::my_mod::my_fn::f`
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

#[cfg(test)]
mod tests {
    use crate::ProfilerSessionBuilder;

    #[test]
    fn profile_block_records_on_scope_exit() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        {
            crate::profile_block!(session, "outer");
            {
                crate::profile_block!(session, "inner");
                assert_eq!(session.open_depth(), 2);
            }
            assert_eq!(session.open_depth(), 1);
        }

        let names: Vec<String> = session
            .drain_backlog()
            .iter()
            .map(|record| record.name().to_owned())
            .collect();
        assert_eq!(names, vec!["inner".to_owned(), "outer".to_owned()]);
    }

    #[test]
    fn profile_function_uses_the_function_name() {
        let session = ProfilerSessionBuilder::new("test").enabled(true).buffered();

        {
            crate::profile_function!(session);
        }

        let records = session.drain_backlog();
        assert_eq!(records.len(), 1);
        assert!(
            records[0].name().ends_with("profile_function_uses_the_function_name"),
            "unexpected block name: {:?}",
            records[0].name()
        );
    }
}
