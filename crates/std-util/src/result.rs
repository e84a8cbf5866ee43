/// Unwraps an `Ok`, panicking with the error's `Debug` output and an
/// optional formatted note otherwise.
#[macro_export]
macro_rules! assert_ok {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Ok(v) => v,
            Err(err) => {
                #[allow(unused_mut)]
                let mut msg = format!("expected `Ok`; error={:?}", err);
                $(
                    msg.push_str(", ");
                    msg.push_str(&format!($($t)*));
                )?
                panic!("{}", msg);
            }
        }
    };
}

/// Unwraps an `Err`. With `=> predicate`, also asserts that calling the
/// named predicate method on the error returns `true`.
#[macro_export]
macro_rules! assert_err {
    ($e:expr => $kind:ident) => {{
        let err = $crate::assert_err!($e);
        assert!(err.$kind(), "expected error satisfying `{}`; error={:?}", stringify!($kind), err);
        err
    }};
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Err(e) => e,
            Ok(actual) => {
                #[allow(unused_mut)]
                let mut msg = format!("expected `Err`; actual=Ok({:?})", actual);
                $(
                    msg.push_str(", ");
                    msg.push_str(&format!($($t)*));
                )?
                panic!("{}", msg);
            }
        }
    };
}
