use chain_btc::network::NetworkParams;

use crate::error::XpubError;
use crate::extended_key::ExtendedPublicKey;
use crate::hd_derivation::BranchKey;
use crate::types::{AddressFamily, Currency, DerivedAddress};

impl AddressFamily {
    /// Encode a compressed public key as an address of this family.
    ///
    /// Fails with `AddressEncoding` when the family is not defined for the
    /// currency (e.g. Taproot on Litecoin, SegWit on Dogecoin).
    pub fn encode(
        self,
        pubkey: &[u8; 33],
        currency: Currency,
        testnet: bool,
    ) -> Result<String, XpubError> {
        if !currency.families().contains(&self) {
            return Err(XpubError::AddressEncoding(format!(
                "{self} addresses are not defined for {currency}"
            )));
        }

        let address = match self {
            AddressFamily::Legacy | AddressFamily::BitcoinCash | AddressFamily::Dogecoin => {
                chain_btc::address::pubkey_to_p2pkh_address(pubkey, params(currency, testnet)?)?
            }
            AddressFamily::WrappedSegwit => {
                chain_btc::address::pubkey_to_p2sh_p2wpkh_address(
                    pubkey,
                    params(currency, testnet)?,
                )?
            }
            AddressFamily::NativeSegwit => {
                chain_btc::address::pubkey_to_p2wpkh_address(pubkey, params(currency, testnet)?)?
            }
            AddressFamily::Taproot => {
                chain_btc::taproot::pubkey_to_p2tr_address(pubkey, params(currency, testnet)?)?
            }
            AddressFamily::Ethereum => chain_eth::address::pubkey_bytes_to_eth_address(pubkey)?,
        };
        Ok(address)
    }
}

fn params(currency: Currency, testnet: bool) -> Result<&'static NetworkParams, XpubError> {
    currency.network_params(testnet).ok_or_else(|| {
        XpubError::AddressEncoding(format!("no network parameters for {currency}"))
    })
}

/// CashAddr form of a Bitcoin Cash P2PKH key.
pub fn cash_address(pubkey: &[u8; 33], testnet: bool) -> Result<String, XpubError> {
    let prefix = params(Currency::BitcoinCash, testnet)?
        .cashaddr_prefix
        .ok_or_else(|| XpubError::AddressEncoding("missing cashaddr prefix".into()))?;
    Ok(chain_bch::cashaddr::pubkey_to_cashaddr(pubkey, prefix)?)
}

/// Starting point for `family` addresses of `account`.
///
/// UTXO families derive `m/account` first; Ethereum takes a single step
/// from the extended key itself and ignores `account`.
pub fn branch_for(
    xpub: &ExtendedPublicKey,
    family: AddressFamily,
    account: u32,
) -> Result<BranchKey, XpubError> {
    if family.is_account_based() {
        Ok(BranchKey::root(xpub))
    } else {
        BranchKey::derive(xpub, account)
    }
}

/// Derive and encode the address at `index` below a cached branch.
pub fn derive_from_branch(
    branch: &BranchKey,
    family: AddressFamily,
    currency: Currency,
    testnet: bool,
    index: u32,
) -> Result<DerivedAddress, XpubError> {
    let key = branch.child(index)?;
    let address = family.encode(&key.public_key, currency, testnet)?;
    let cash_address = match family {
        AddressFamily::BitcoinCash => Some(cash_address(&key.public_key, testnet)?),
        _ => None,
    };

    Ok(DerivedAddress {
        family,
        address,
        cash_address,
        account: key.account,
        index,
    })
}

/// Derive the `family` address at `m/account/index`.
pub fn derive_address(
    xpub: &ExtendedPublicKey,
    family: AddressFamily,
    currency: Currency,
    testnet: bool,
    account: u32,
    index: u32,
) -> Result<DerivedAddress, XpubError> {
    let branch = branch_for(xpub, family, account)?;
    derive_from_branch(&branch, family, currency, testnet, index)
}

/// Infer the address family from an address's prefix.
///
/// Legacy matches map to the currency's own legacy family (Bitcoin Cash,
/// Dogecoin). The family must be one `currency` derives.
pub fn resolve_family(address: &str, currency: Currency) -> Result<AddressFamily, XpubError> {
    let address = address.trim();
    let lower = address.to_ascii_lowercase();

    let family = if lower.starts_with("bc1p") || lower.starts_with("tb1p") {
        AddressFamily::Taproot
    } else if ["bc1q", "tb1", "ltc1", "tltc1"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        AddressFamily::NativeSegwit
    } else if lower.starts_with("0x") {
        AddressFamily::Ethereum
    } else {
        match address.chars().next() {
            Some('3' | '2' | 'M') => AddressFamily::WrappedSegwit,
            Some('1' | 'n' | 'm' | 'L') => match currency {
                Currency::BitcoinCash => AddressFamily::BitcoinCash,
                Currency::Dogecoin => AddressFamily::Dogecoin,
                _ => AddressFamily::Legacy,
            },
            Some('D') => AddressFamily::Dogecoin,
            _ => {
                return Err(XpubError::UnsupportedAddress(format!(
                    "{address}: unrecognized address prefix"
                )))
            }
        }
    };

    if !currency.families().contains(&family) {
        return Err(XpubError::UnsupportedAddress(format!(
            "{address}: {family} addresses are not derived for {currency}"
        )));
    }
    Ok(family)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTC_XPUB: &str = "xpub6C9vKwUFiBLbQKS6mhEAtEYhS24sVz8MkvMjxQSECTZVCnFmy675zojLthvXVuQf15RT6ggmt7PTgLBV2tLHHdJenoEkNWe5VPBETncxf2q";
    const TAPROOT_XPUB: &str = "xpub6DTLT6HYPfc617GkjHcJML8SWvL36eyxFYbUWtL5hqFtTEsdgjMm4v5meHyvmMAB8q6chfxbKgPb4LjZQxmd8iQFdRYP49PG6H7h7L1EEBS";
    const LTC_XPUB: &str = "Ltub2ZoLFXBt7mLeb4out9duUxMmqCSX9mqi73NcQ8nyjQsJEm76JP1poExdj9rRCFfHyuUVKgj5t2B2EBsmFvKivKzVpmKKZ4XiAVx65s3WZ8j";
    const BCH_XPUB: &str = "xpub6CJgFcZxrd2yjt11C91E4xTb7whLw1amvXzzhhdmfqutTdbT53GS4nbS6pcsPQ2EJyPBxWi7Rvro2pqBVUuKj1BqET1gujWmLE6WJD7pb1o";
    const DOGE_XPUB: &str = "dgub8rDzyFqzw35B8zSqrW9sHDivXL2YmcGEVKyRMhPh8SoeUmkGozD5YzNyEkSH1T9zhvy9iQzns7igxrhQkg4jETWna4X1AUC4MT3YgHenTMB";
    const TPUB: &str = "tpubDCCpYzH6NwKVnAipf8ChTfiTG4XtmxncwL97rQGLJ3SqfFCWzDq78LX1a7s2WXJsyfvR6bMiLkC7FSXLGoBo3dsH6DE9JKJb6LQSPasuSWj";
    const ETH_XPUB_A: &str = "xpub6Fx82VfZ6EdtNfD7eANUEvKYxB2AV4hf4Xm4LpiyNVmNHDGKu7T72WVr7qmCzKFC3VQMYrMMNJVy9BNXKUtUebxZx7kRYNG89zwKG5g4Sc6";
    const ETH_XPUB_B: &str = "xpub6GkCbW4FDnz8k9zhroVhZefi9fXhFFuTmmcQqfQKPDBrQjtSu4pdLpQ1Tje1BAzUw6PbJ47MMtNZ4RYM42VzRNxwaYUFnm3R44Lejvh9nHE";

    fn key(s: &str) -> ExtendedPublicKey {
        s.parse().unwrap()
    }

    fn addr(
        xpub: &str,
        family: AddressFamily,
        currency: Currency,
        account: u32,
        index: u32,
    ) -> String {
        derive_address(&key(xpub), family, currency, false, account, index)
            .unwrap()
            .address
    }

    #[test]
    fn test_bitcoin_first_receive_addresses() {
        use AddressFamily::*;
        let btc = Currency::Bitcoin;
        assert_eq!(addr(BTC_XPUB, Legacy, btc, 0, 0), "1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB");
        assert_eq!(
            addr(BTC_XPUB, WrappedSegwit, btc, 0, 0),
            "3KwhDgypnTVdEDsF9PCDJcizjVWemGXB3X"
        );
        assert_eq!(
            addr(BTC_XPUB, NativeSegwit, btc, 0, 0),
            "bc1qvngxns2mvj00uptukvnh63apg6mg4ac3wan0xz"
        );
        assert_eq!(
            addr(BTC_XPUB, Taproot, btc, 0, 0),
            "bc1pf7h63kxqmm0rwhnm7m4j96huuw4anepu5xhug9mjjcy63cznhfrs3s47ht"
        );
    }

    #[test]
    fn test_bitcoin_other_paths() {
        use AddressFamily::*;
        let btc = Currency::Bitcoin;
        assert_eq!(
            addr(BTC_XPUB, Legacy, btc, 1, 10_000_000),
            "17Csc51yzoY74HNU6DLf3LcPNtNVf2JRhM"
        );
        assert_eq!(addr(BTC_XPUB, Legacy, btc, 2, 588), "1C3DK2BwhPRZ7e14V7pHj1jDWbTrP3qFnt");
        assert_eq!(
            addr(BTC_XPUB, NativeSegwit, btc, 1, 0),
            "bc1q43287ymsj3zeg3wvqv355yq8aa4yhwf998wmhj"
        );
        let native: Vec<String> = (1..=5)
            .map(|i| addr(BTC_XPUB, NativeSegwit, btc, 0, i))
            .collect();
        assert_eq!(
            native,
            [
                "bc1qz2vselsfhyqckeelqgks4avuav95nkzc2gt092",
                "bc1qszp03wdspg6005w73hzccw0u88ghge8kg0ccxh",
                "bc1qz9urfq9m4sa2lmscgdapmtkmg04yzgtsmpr69p",
                "bc1qdzxunt8f9yzvmmalzetyrg4kdeyquuzwrufn5s",
                "bc1qwdal78rr9k637cczh6427yum2vhjtfv5ydwvj6",
            ]
        );
    }

    #[test]
    fn test_taproot_vector() {
        assert_eq!(
            addr(TAPROOT_XPUB, AddressFamily::Taproot, Currency::Bitcoin, 0, 0),
            "bc1pn2zdr3zd5d8la8nuq2aqtpxspgqet9v9dfl8c7w2flw9pra7jp5sdyeq9e"
        );
    }

    #[test]
    fn test_litecoin_first_receive_addresses() {
        use AddressFamily::*;
        let ltc = Currency::Litecoin;
        assert_eq!(addr(LTC_XPUB, Legacy, ltc, 0, 0), "LQvJrXTHfAvUBGRs6LRTwC6nX7rYhzVbu9");
        assert_eq!(
            addr(LTC_XPUB, WrappedSegwit, ltc, 0, 0),
            "MBz6dSyR1RkkUa7iEiKsXapEGEK6hxjWci"
        );
        assert_eq!(
            addr(LTC_XPUB, NativeSegwit, ltc, 0, 0),
            "ltc1q8ea8f4337su3ucfeaxq5pyyz3nttx6v3ehvg0l"
        );
    }

    #[test]
    fn test_bitcoin_cash_legacy_and_cashaddr() {
        let cases = [
            (0, 0, "195D2Q9NPSpZxkD2gmEtNFzK8s65FS7QZB", "bitcoincash:qpvgedg5e92ut08ksxrw0w9l9xevecfwg5dg503vfy"),
            (0, 1, "1Nchm2Yu65gGua1jNF1viaNPYLtjmmgzpe", "bitcoincash:qrk3kw2a79nnlpsqdqfaqxqvxnqvuedq7y8ka9e93w"),
            (1, 0, "1JJEsMr4dpTtsA9JL8HyQVN2NZ4WsMuoMj", "bitcoincash:qz7mej2vgfghndd7p02prwferknh8drewvsfv25j3a"),
            (1, 10_000_000, "1Lutb2GiXzT1VmstpNp89Gdv5xK1WxS7yw", "bitcoincash:qrdxk9gv9680spv4aej88gkzya7tvx9tzqg4wdqmt0"),
        ];
        let xpub = key(BCH_XPUB);
        for (account, index, legacy, cash) in cases {
            let derived = derive_address(
                &xpub,
                AddressFamily::BitcoinCash,
                Currency::BitcoinCash,
                false,
                account,
                index,
            )
            .unwrap();
            assert_eq!(derived.address, legacy);
            assert_eq!(derived.cash_address.as_deref(), Some(cash));
        }
    }

    #[test]
    fn test_dogecoin_addresses() {
        use AddressFamily::Dogecoin;
        let doge = Currency::Dogecoin;
        assert_eq!(addr(DOGE_XPUB, Dogecoin, doge, 0, 0), "DNoFXKQVgbYU5pnpJEoiJjoWs1yH74KcvC");
        assert_eq!(addr(DOGE_XPUB, Dogecoin, doge, 1, 0), "DLnAvdtK2DDGeakaQUf2BUvZVUJw7KRgTg");
        assert_eq!(
            addr(DOGE_XPUB, Dogecoin, doge, 1, 10_000_000),
            "D6Yf9DRNY8VSTtorybWJzJbDBugExnMTsg"
        );
        assert_eq!(addr(DOGE_XPUB, Dogecoin, doge, 1, 640), "DSZsASgFRbGVhRnPE9bmeyd8s9izatDRXL");
    }

    #[test]
    fn test_bitcoin_testnet_addresses() {
        use AddressFamily::*;
        let xpub = key(TPUB);
        let derive = |family| {
            derive_address(&xpub, family, Currency::Bitcoin, true, 0, 0)
                .unwrap()
                .address
        };
        assert_eq!(derive(Legacy), "mmv9shvEyT8S3zvuCpjqqF66o4hbAcQuep");
        assert_eq!(derive(WrappedSegwit), "2N8gfmL6ffuLTqrxie5GEJwhNahuoviWx51");
        assert_eq!(derive(NativeSegwit), "tb1qgcel6r30c8pvjlplh9j3w55qnlv6r2dk5j9gv5");
        assert_eq!(
            derive(Taproot),
            "tb1p3phphcd4hapnux655mdashw2676yg5sn7e0uc8ka7e8kuryu5m6sryzk34"
        );
    }

    #[test]
    fn test_ethereum_encoder_on_root_key() {
        let a = key(ETH_XPUB_A);
        let b = key(ETH_XPUB_B);
        assert_eq!(
            AddressFamily::Ethereum.encode(&a.public_key, Currency::Ethereum, false).unwrap(),
            "0xb56aa13aab4869da8ae07ad2a04ec2deec35e0f0"
        );
        assert_eq!(
            AddressFamily::Ethereum.encode(&b.public_key, Currency::Ethereum, false).unwrap(),
            "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1"
        );
    }

    #[test]
    fn test_ethereum_derives_one_step() {
        use AddressFamily::Ethereum;
        let eth = Currency::Ethereum;
        assert_eq!(
            addr(ETH_XPUB_A, Ethereum, eth, 0, 0),
            "0x388128044b03a70661062ffa71c3d97069970e50"
        );
        assert_eq!(
            addr(ETH_XPUB_A, Ethereum, eth, 0, 1),
            "0xadeb9bb60964dd99f4e8718e4a8b1808b571607f"
        );
        assert_eq!(
            addr(ETH_XPUB_B, Ethereum, eth, 0, 0),
            "0x105d55618dcc3a172ca0b66f54745289e2528f08"
        );
        assert_eq!(
            addr(ETH_XPUB_B, Ethereum, eth, 0, 1),
            "0xd52db25994bc918236a7fca92b221cc6146c8ad6"
        );
    }

    #[test]
    fn test_ethereum_ignores_account() {
        let xpub = key(ETH_XPUB_A);
        let a = derive_address(&xpub, AddressFamily::Ethereum, Currency::Ethereum, false, 0, 3)
            .unwrap();
        let b = derive_address(&xpub, AddressFamily::Ethereum, Currency::Ethereum, false, 7, 3)
            .unwrap();
        assert_eq!(a.address, b.address);
        assert_eq!(b.account, 0);
    }

    #[test]
    fn test_families_are_distinct() {
        let xpub = key(BTC_XPUB);
        let addresses: Vec<String> = Currency::Bitcoin
            .families()
            .iter()
            .map(|f| {
                derive_address(&xpub, *f, Currency::Bitcoin, false, 0, 0)
                    .unwrap()
                    .address
            })
            .collect();
        for (i, a) in addresses.iter().enumerate() {
            for b in &addresses[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_undefined_family_for_currency() {
        let xpub = key(LTC_XPUB);
        let result =
            derive_address(&xpub, AddressFamily::Taproot, Currency::Litecoin, false, 0, 0);
        assert!(matches!(result, Err(XpubError::AddressEncoding(_))));

        let result =
            derive_address(&xpub, AddressFamily::NativeSegwit, Currency::Dogecoin, false, 0, 0);
        assert!(matches!(result, Err(XpubError::AddressEncoding(_))));
    }

    #[test]
    fn test_taproot_only_on_bitcoin() {
        for (xpub, currency) in [(LTC_XPUB, Currency::Litecoin), (DOGE_XPUB, Currency::Dogecoin)] {
            let result = derive_address(&key(xpub), AddressFamily::Taproot, currency, false, 0, 0);
            assert!(matches!(result, Err(XpubError::AddressEncoding(_))), "{currency}");

            let result = resolve_family(
                "bc1pf7h63kxqmm0rwhnm7m4j96huuw4anepu5xhug9mjjcy63cznhfrs3s47ht",
                currency,
            );
            assert!(matches!(result, Err(XpubError::UnsupportedAddress(_))), "{currency}");
        }
    }

    #[test]
    fn test_only_bitcoin_cash_has_cash_address() {
        let derived = derive_address(
            &key(BTC_XPUB),
            AddressFamily::Legacy,
            Currency::Bitcoin,
            false,
            0,
            0,
        )
        .unwrap();
        assert!(derived.cash_address.is_none());
    }

    #[test]
    fn test_resolve_family_by_prefix() {
        use AddressFamily::*;
        let btc = Currency::Bitcoin;
        let cases = [
            ("1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB", Legacy),
            ("3KwhDgypnTVdEDsF9PCDJcizjVWemGXB3X", WrappedSegwit),
            ("bc1qvngxns2mvj00uptukvnh63apg6mg4ac3wan0xz", NativeSegwit),
            ("BC1QVNGXNS2MVJ00UPTUKVNH63APG6MG4AC3WAN0XZ", NativeSegwit),
            ("bc1pf7h63kxqmm0rwhnm7m4j96huuw4anepu5xhug9mjjcy63cznhfrs3s47ht", Taproot),
            ("mmv9shvEyT8S3zvuCpjqqF66o4hbAcQuep", Legacy),
            ("2N8gfmL6ffuLTqrxie5GEJwhNahuoviWx51", WrappedSegwit),
            ("tb1qgcel6r30c8pvjlplh9j3w55qnlv6r2dk5j9gv5", NativeSegwit),
            ("tb1p3phphcd4hapnux655mdashw2676yg5sn7e0uc8ka7e8kuryu5m6sryzk34", Taproot),
        ];
        for (address, family) in cases {
            assert_eq!(resolve_family(address, btc).unwrap(), family, "{address}");
        }
    }

    #[test]
    fn test_resolve_family_other_currencies() {
        use AddressFamily::*;
        assert_eq!(
            resolve_family("LQvJrXTHfAvUBGRs6LRTwC6nX7rYhzVbu9", Currency::Litecoin).unwrap(),
            Legacy
        );
        assert_eq!(
            resolve_family("MBz6dSyR1RkkUa7iEiKsXapEGEK6hxjWci", Currency::Litecoin).unwrap(),
            WrappedSegwit
        );
        assert_eq!(
            resolve_family("ltc1q8ea8f4337su3ucfeaxq5pyyz3nttx6v3ehvg0l", Currency::Litecoin)
                .unwrap(),
            NativeSegwit
        );
        assert_eq!(
            resolve_family("195D2Q9NPSpZxkD2gmEtNFzK8s65FS7QZB", Currency::BitcoinCash).unwrap(),
            BitcoinCash
        );
        assert_eq!(
            resolve_family("DNoFXKQVgbYU5pnpJEoiJjoWs1yH74KcvC", Currency::Dogecoin).unwrap(),
            Dogecoin
        );
        assert_eq!(
            resolve_family("0x388128044b03a70661062ffa71c3d97069970e50", Currency::Ethereum)
                .unwrap(),
            Ethereum
        );
    }

    #[test]
    fn test_resolve_family_rejects_unknown_and_foreign() {
        assert!(matches!(
            resolve_family("zzz", Currency::Bitcoin),
            Err(XpubError::UnsupportedAddress(_))
        ));
        assert!(matches!(
            resolve_family("", Currency::Bitcoin),
            Err(XpubError::UnsupportedAddress(_))
        ));
        // Taproot is not derived for Litecoin.
        assert!(matches!(
            resolve_family(
                "bc1pf7h63kxqmm0rwhnm7m4j96huuw4anepu5xhug9mjjcy63cznhfrs3s47ht",
                Currency::Litecoin
            ),
            Err(XpubError::UnsupportedAddress(_))
        ));
        // An Ethereum address is meaningless for a Bitcoin scan.
        assert!(matches!(
            resolve_family("0x388128044b03a70661062ffa71c3d97069970e50", Currency::Bitcoin),
            Err(XpubError::UnsupportedAddress(_))
        ));
    }
}
