// src/registry.rs
//! The 34 provincial-level regions, compiled in.
//!
//! Order is GB/T 2260 code order and is the order of `provinces` in every
//! published snapshot. Ids are ISO 3166-2:CN suffixes and are never reused.

use crate::model::RegionType;

const MUN: RegionType = RegionType::Municipality;
const PRV: RegionType = RegionType::Province;
const AR: RegionType = RegionType::AutonomousRegion;
const SAR: RegionType = RegionType::SpecialAdministrativeRegion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Province {
    pub id: &'static str,
    pub name: &'static str,
    pub name_zh: &'static str,
    pub region_type: RegionType,
    /// Page name on the primary upstream (`/<slug>.shtml`). `None` when the
    /// site has no page for the region.
    pub slug: Option<&'static str>,
}

const fn p(
    id: &'static str,
    name: &'static str,
    name_zh: &'static str,
    region_type: RegionType,
    slug: Option<&'static str>,
) -> Province {
    Province { id, name, name_zh, region_type, slug }
}

static PROVINCES: [Province; 34] = [
    p("BJ", "Beijing Municipality", "北京", MUN, Some("beijing")),
    p("TJ", "Tianjin Municipality", "天津", MUN, Some("tianjin")),
    p("HE", "Hebei Province", "河北", PRV, Some("hebei")),
    p("SX", "Shanxi Province", "山西", PRV, Some("shanxi")),
    p("NM", "Inner Mongolia Autonomous Region", "内蒙古", AR, Some("neimenggu")),
    p("LN", "Liaoning Province", "辽宁", PRV, Some("liaoning")),
    p("JL", "Jilin Province", "吉林", PRV, Some("jilin")),
    p("HL", "Heilongjiang Province", "黑龙江", PRV, Some("heilongjiang")),
    p("SH", "Shanghai Municipality", "上海", MUN, Some("shanghai")),
    p("JS", "Jiangsu Province", "江苏", PRV, Some("jiangsu")),
    p("ZJ", "Zhejiang Province", "浙江", PRV, Some("zhejiang")),
    p("AH", "Anhui Province", "安徽", PRV, Some("anhui")),
    p("FJ", "Fujian Province", "福建", PRV, Some("fujian")),
    p("JX", "Jiangxi Province", "江西", PRV, Some("jiangxi")),
    p("SD", "Shandong Province", "山东", PRV, Some("shandong")),
    p("HA", "Henan Province", "河南", PRV, Some("henan")),
    p("HB", "Hubei Province", "湖北", PRV, Some("hubei")),
    p("HN", "Hunan Province", "湖南", PRV, Some("hunan")),
    p("GD", "Guangdong Province", "广东", PRV, Some("guangdong")),
    p("GX", "Guangxi Zhuang Autonomous Region", "广西", AR, Some("guangxi")),
    p("HI", "Hainan Province", "海南", PRV, Some("hainan")),
    p("CQ", "Chongqing Municipality", "重庆", MUN, Some("chongqing")),
    p("SC", "Sichuan Province", "四川", PRV, Some("sichuan")),
    p("GZ", "Guizhou Province", "贵州", PRV, Some("guizhou")),
    p("YN", "Yunnan Province", "云南", PRV, Some("yunnan")),
    p("XZ", "Tibet Autonomous Region", "西藏", AR, Some("xizang")),
    p("SN", "Shaanxi Province", "陕西", PRV, Some("shaanxi")),
    p("GS", "Gansu Province", "甘肃", PRV, Some("gansu")),
    p("QH", "Qinghai Province", "青海", PRV, Some("qinghai")),
    p("NX", "Ningxia Hui Autonomous Region", "宁夏", AR, Some("ningxia")),
    p("XJ", "Xinjiang Uygur Autonomous Region", "新疆", AR, Some("xinjiang")),
    p("TW", "Taiwan Province", "台湾", PRV, None),
    p("HK", "Hong Kong Special Administrative Region", "香港", SAR, None),
    p("MO", "Macao Special Administrative Region", "澳门", SAR, None),
];

pub fn list_provinces() -> &'static [Province] {
    &PROVINCES
}

pub fn find(id: &str) -> Option<&'static Province> {
    PROVINCES.iter().find(|p| p.id == id)
}

/// Registry index of `id`, i.e. its slot in a snapshot.
pub fn position(id: &str) -> Option<usize> {
    PROVINCES.iter().position(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn thirty_four_unique_regions() {
        let all = list_provinces();
        assert_eq!(all.len(), 34);

        let ids: HashSet<_> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 34);

        let zh: HashSet<_> = all.iter().map(|p| p.name_zh).collect();
        assert_eq!(zh.len(), 34);
    }

    #[test]
    fn region_type_breakdown() {
        let count = |t: RegionType| list_provinces().iter().filter(|p| p.region_type == t).count();
        assert_eq!(count(MUN), 4);
        assert_eq!(count(PRV), 23);
        assert_eq!(count(AR), 5);
        assert_eq!(count(SAR), 2);
    }

    #[test]
    fn lookup_and_position() {
        assert_eq!(find("XZ").map(|p| p.name), Some("Tibet Autonomous Region"));
        assert_eq!(position("BJ"), Some(0));
        assert_eq!(position("MO"), Some(33));
        assert!(find("ZZ").is_none());
    }

    #[test]
    fn slugs_are_unique_when_present() {
        let slugs: Vec<_> = list_provinces().iter().filter_map(|p| p.slug).collect();
        let set: HashSet<_> = slugs.iter().collect();
        assert_eq!(slugs.len(), set.len());
        assert_eq!(slugs.len(), 31);
    }
}
