#[macro_export]
macro_rules! assert_none {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            None => {}
            Some(actual) => {
                #[allow(unused_mut)]
                let mut msg = format!("expected `None`; actual=Some({:?})", actual);
                $(
                    msg.push_str(", ");
                    msg.push_str(&format!($($t)*));
                )?
                panic!("{}", msg);
            }
        }
    };
}

#[macro_export]
macro_rules! assert_some {
    ($e:expr $(, $($t:tt)* )?) => {
        match $e {
            Some(v) => v,
            None => {
                #[allow(unused_mut)]
                let mut msg = String::from("expected `Some`; actual=None");
                $(
                    msg.push_str(", ");
                    msg.push_str(&format!($($t)*));
                )?
                panic!("{}", msg);
            }
        }
    };
}
