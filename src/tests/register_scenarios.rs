#[cfg(test)]
mod tests {
    use crate::code::register_spec::{LocalItem, RegisterSpec, RegisterSpecTable};
    use crate::code::register_spec_list::RegisterSpecList;
    use crate::types::Type;
    use rand::Rng;

    #[test]
    fn equal_specs_are_shared() {
        let table = RegisterSpecTable::new();
        let a = table.make_local(4, Type::Long, LocalItem::named("count"));
        let b = table.make_local(4, Type::Long, LocalItem::named("count"));
        assert!(RegisterSpec::ptr_eq(&a, &b));
        assert!(!RegisterSpec::ptr_eq(&a, &table.make(4, Type::Long)));
        assert_eq!(table.len(), 2);

        table.clear();
        assert!(table.is_empty());
        let c = table.make_local(4, Type::Long, LocalItem::named("count"));
        assert!(!RegisterSpec::ptr_eq(&a, &c));
        assert_eq!(a, c);
    }

    #[test]
    fn tables_are_independent() {
        let first = RegisterSpecTable::new();
        let second = RegisterSpecTable::new();
        let a = first.make(0, Type::Int);
        let b = second.make(0, Type::Int);
        assert!(!RegisterSpec::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn offset_round_trip() {
        let table = RegisterSpecTable::new();
        let mut rng = rand::rng();
        for _ in 0..200 {
            let len = rng.random_range(0..8);
            let mut specs = Vec::with_capacity(len);
            for _ in 0..len {
                let reg = rng.random_range(0..64u32);
                let t = if rng.random_bool(0.25) { Type::Double } else { Type::Int };
                specs.push(table.make(reg, t));
            }
            let list = RegisterSpecList::new(specs);
            let delta = rng.random_range(0..1000i32);

            let there = list.with_offset(&table, delta).unwrap();
            let back = there.with_offset(&table, -delta).unwrap();
            assert_eq!(back, list);
            for (a, b) in back.iter().zip(list.iter()) {
                assert!(RegisterSpec::ptr_eq(a, b));
            }
        }
    }
}
