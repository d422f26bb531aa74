//! Dynamic method dispatch for hosts calling regions by name.

use regionbox_core::HostValue;

use crate::error::RegionError;
use crate::region::Region;

impl Region {
    /// Calls a region method by its host-facing name.
    ///
    /// | method              | arguments    | returns          |
    /// |---------------------|--------------|------------------|
    /// | `get`               | key          | value            |
    /// | `put`               | key, value   | the stored value |
    /// | `clear`             | none         | `true`           |
    /// | `registerAllKeys`   | none         | `true`           |
    /// | `unregisterAllKeys` | none         | `true`           |
    ///
    /// Keys are converted with [`HostValue::to_key_string`].
    pub fn invoke(&self, method: &str, args: Vec<HostValue>) -> Result<HostValue, RegionError> {
        match method {
            "get" => {
                let [key] = arguments::<1>("get", "a key", args)?;
                self.get(&key.to_key_string())
            }
            "put" => {
                let [key, value] = arguments::<2>("put", "a key and a value", args)?;
                self.put(&key.to_key_string(), value)
            }
            "clear" => {
                let [] = arguments::<0>("clear", "no arguments", args)?;
                self.clear().map(|()| HostValue::Bool(true))
            }
            "registerAllKeys" => {
                let [] = arguments::<0>("registerAllKeys", "no arguments", args)?;
                self.register_all_keys().map(|()| HostValue::Bool(true))
            }
            "unregisterAllKeys" => {
                let [] = arguments::<0>("unregisterAllKeys", "no arguments", args)?;
                self.unregister_all_keys().map(|()| HostValue::Bool(true))
            }
            other => Err(RegionError::UnknownMethod(other.into())),
        }
    }
}

fn arguments<const N: usize>(
    method: &'static str,
    expected: &'static str,
    args: Vec<HostValue>,
) -> Result<[HostValue; N], RegionError> {
    let received = args.len();
    <[HostValue; N]>::try_from(args).map_err(|_| RegionError::InvalidArgumentCount {
        method,
        expected,
        received,
    })
}
