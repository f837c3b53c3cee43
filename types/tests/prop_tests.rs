//! Property tests for the wire forms of the fundamental types.

use fir_types::{AccountAddress, CaseStatus, CaseType, ChainId, ContentDigest};
use proptest::prelude::*;

proptest! {
    #[test]
    fn address_display_parse_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
        let addr = AccountAddress::new(bytes);
        let parsed = AccountAddress::parse(&addr.to_string()).unwrap();
        prop_assert_eq!(addr, parsed);
    }

    #[test]
    fn address_parse_is_case_insensitive(bytes in prop::array::uniform20(any::<u8>())) {
        let addr = AccountAddress::new(bytes);
        let upper = addr.to_string().to_uppercase().replace("0X", "0x");
        prop_assert_eq!(addr, AccountAddress::parse(&upper).unwrap());
    }

    #[test]
    fn digest_display_parse_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let digest = ContentDigest::new(bytes);
        let parsed = ContentDigest::parse(&digest.to_string()).unwrap();
        prop_assert_eq!(digest, parsed);
    }

    #[test]
    fn chain_id_hex_roundtrip(id in any::<u64>()) {
        let parsed = ChainId::from_hex_str(&format!("0x{id:x}")).unwrap();
        prop_assert_eq!(parsed, ChainId::new(id));
    }

    #[test]
    fn unknown_status_codes_are_rejected(code in 5u8..) {
        prop_assert!(CaseStatus::from_wire_code(code).is_err());
    }

    #[test]
    fn unknown_case_type_codes_are_rejected(code in 5u8..) {
        prop_assert!(CaseType::from_wire_code(code).is_err());
    }
}
