pub use crate::error::{
    ConfigurationError, DecodeError, Error, InputDataError, Result, SplitError,
};
pub use futures::{
    future,
    stream::{self, BoxStream, Stream, StreamExt as _, TryStreamExt as _},
};
pub use indexmap::IndexSet;
pub use itertools::Itertools as _;
pub use log::{info, warn};
pub use ndarray::{
    s, Array1, Array2, Array3, Array4, ArrayD, ArrayView3, Axis, IxDyn,
};
pub use noisy_float::prelude::*;
pub use par_stream::prelude::*;
pub use rand::prelude::*;
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    borrow::Borrow,
    convert::{TryFrom, TryInto},
    fmt::{self, Debug, Display},
    fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{
        atomic::{self, AtomicU64},
        Arc,
    },
    time::Duration,
};
