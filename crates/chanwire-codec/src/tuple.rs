//! Fixed-arity tuples: each field's encoding, in declared order, with no
//! separators.

use chanwire_transport::{ReadChannel, WriteChannel};

use crate::error::Result;
use crate::traits::{Decode, Encode};

macro_rules! tuple_codec {
    ($($field:ident),+) => {
        impl<$($field: Encode),+> Encode for ($($field,)+) {
            #[allow(non_snake_case)]
            fn encode(&self, ch: &mut dyn WriteChannel) -> Result<()> {
                let ($($field,)+) = self;
                $($field.encode(ch)?;)+
                Ok(())
            }
        }

        impl<$($field: Decode),+> Decode for ($($field,)+) {
            const ZERO_WIDTH: bool = true $(&& $field::ZERO_WIDTH)+;

            fn decode(ch: &mut dyn ReadChannel) -> Result<Self> {
                // Tuple expressions evaluate left to right.
                Ok(($($field::decode(ch)?,)+))
            }
        }
    };
}

tuple_codec!(A);
tuple_codec!(A, B);
tuple_codec!(A, B, C);
tuple_codec!(A, B, C, D);
tuple_codec!(A, B, C, D, E);
tuple_codec!(A, B, C, D, E, F);
tuple_codec!(A, B, C, D, E, F, G);
tuple_codec!(A, B, C, D, E, F, G, H);
tuple_codec!(A, B, C, D, E, F, G, H, I);
tuple_codec!(A, B, C, D, E, F, G, H, I, J);
tuple_codec!(A, B, C, D, E, F, G, H, I, J, K);
tuple_codec!(A, B, C, D, E, F, G, H, I, J, K, L);
