macro_rules! lookup_table {
    ($name:ident => $( $slice:expr ),+) => {
        const $name: [bool; 256] = {
            let mut arr = [false; 256];
            $(
                let mut i = 0;
                while i < $slice.len() {
                    arr[$slice[i] as usize] = true;
                    i += 1;
                }
            )*
            arr
        };
    };
}

/// Runs `$body` for every element of a comma separated list.
///
/// Linear white space is allowed around the commas; the list must
/// cover the rest of the input.
macro_rules! comma_separated {
    ($parser:ident => $body:expr) => {{
        loop {
            $parser.skip_lws();
            $body;
            $parser.skip_lws();
            match $parser.peek() {
                Some(b',') => {
                    $parser.advance();
                }
                None => break,
                Some(_) => return $parser.error("expected ',' or end of value"),
            }
        }
    }};
}

/// Collects the elements produced by `$body` over a comma separated list.
macro_rules! comma_separated_value {
    ($parser:ident => $body:expr) => {{
        let mut items = Vec::with_capacity(1);
        $crate::macros::comma_separated!($parser => items.push($body));
        items
    }};
}

pub(crate) use comma_separated;
pub(crate) use comma_separated_value;
pub(crate) use lookup_table;
