use cashflow_core::{
    CashFlow, ExpenseCategory, ExpenseRecord, IncomeKind, IncomeRecord, LayoutConfig,
};
use cashflow_layout::{
    ColumnOffsets, DEFICIT_AGGREGATE_ID, DEFICIT_SOURCE_ID, Error, Geometry, LinkKind, NodeKind,
    SURPLUS_ID, Surface, TOTAL_ID, category_node_id, expense_node_id, income_node_id,
    layout_cash_flow, layout_or_empty, type_node_id,
};

const EPS: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS * (1.0 + a.abs().max(b.abs()))
}

fn surface() -> Surface {
    Surface::new(700.0, 420.0)
}

fn layout(income: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Geometry {
    layout_cash_flow(
        income,
        expenses,
        surface(),
        &ColumnOffsets::default(),
        &LayoutConfig::default(),
    )
    .expect("layout ok")
}

fn wage_and_tax() -> (Vec<IncomeRecord>, Vec<ExpenseRecord>) {
    let income = vec![
        IncomeRecord::new("Wage", 5300.0, IncomeKind::Active).with_id("wage"),
        IncomeRecord::new("Dividends", 262.0, IncomeKind::Passive).with_id("div"),
    ];
    let expenses = vec![ExpenseRecord::new("Tax", 494.0, ExpenseCategory::Payroll).with_id("tax")];
    (income, expenses)
}

fn assert_well_formed(g: &Geometry) {
    assert!(g.dangling_endpoint().is_none(), "dangling link endpoint");

    for n in &g.nodes {
        assert!(n.x.is_finite() && n.y.is_finite(), "node {} position", n.id);
        assert!(n.width.is_finite() && n.height.is_finite() && n.height >= 0.0);
        assert!(n.column < 5);
        assert!(n.y >= -EPS && n.bottom() <= g.height + EPS, "node {} off surface", n.id);
    }

    for column in 0..5 {
        let mut nodes: Vec<_> = g.nodes_in_column(column).collect();
        let stacked: f64 = nodes.iter().map(|n| n.height).sum();
        assert!(stacked <= g.height + EPS, "column {column} taller than surface");
        nodes.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
        for pair in nodes.windows(2) {
            assert!(
                pair[1].y + EPS >= pair[0].bottom(),
                "{} overlaps {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    for l in &g.links {
        let source = g.node(&l.source_id).unwrap();
        let target = g.node(&l.target_id).unwrap();
        assert!(l.value >= 0.0);
        assert!(l.value <= source.value + EPS && l.value <= target.value + EPS);
        assert!(approx_eq(l.source_anchor_x, source.right()));
        assert!(approx_eq(l.target_anchor_x, target.x));
        assert!(l.source_anchor_y >= source.y - EPS && l.source_anchor_y <= source.bottom() + EPS);
        assert!(l.target_anchor_y >= target.y - EPS && l.target_anchor_y <= target.bottom() + EPS);
    }
}

fn assert_flow_conserved(g: &Geometry) {
    for n in &g.nodes {
        let inflow: f64 = g.incoming(&n.id).map(|l| l.value).sum();
        let outflow: f64 = g.outgoing(&n.id).map(|l| l.value).sum();
        let has_in = g.incoming(&n.id).next().is_some();
        let has_out = g.outgoing(&n.id).next().is_some();
        if has_in && has_out {
            assert!(
                approx_eq(inflow, outflow),
                "{}: in {inflow} != out {outflow}",
                n.id
            );
        }
    }
}

#[test]
fn wage_dividends_tax_example() {
    let (income, expenses) = wage_and_tax();
    let g = layout(&income, &expenses);

    assert_eq!(g.total_income, 5562.0);
    assert_eq!(g.total_expense, 494.0);
    assert_eq!(g.surplus, 5068.0);

    let categories: Vec<_> = g.nodes_of_kind(NodeKind::Category).collect();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, category_node_id(ExpenseCategory::Payroll));
    assert_eq!(categories[0].label, "Payroll Deductions");

    let leaves: Vec<_> = g.nodes_of_kind(NodeKind::Leaf).collect();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].id, expense_node_id("tax"));
    assert_eq!(leaves[0].value, 494.0);

    let surplus = g
        .outgoing(TOTAL_ID)
        .find(|l| l.target_id == SURPLUS_ID)
        .expect("surplus link");
    assert_eq!(surplus.value, 5068.0);
    assert_eq!(surplus.kind, LinkKind::Surplus);
    assert_eq!(g.node(SURPLUS_ID).unwrap().column, 4);
    assert_eq!(g.nodes_of_kind(NodeKind::Deficit).count(), 0);

    assert_eq!(g.nodes.len(), 8);
    assert_eq!(g.links.len(), 7);
    assert_well_formed(&g);
    assert_flow_conserved(&g);
}

#[test]
fn empty_records_produce_empty_geometry() {
    let g = layout(&[], &[]);
    assert!(g.nodes.is_empty());
    assert!(g.links.is_empty());
    assert_eq!(g.total_income, 0.0);
    assert_eq!(g.total_expense, 0.0);
    assert_eq!(g.surplus, 0.0);
    assert!(g.node_width > 0.0);
}

#[test]
fn overspending_synthesizes_deficit_flow_into_total() {
    let income = vec![IncomeRecord::new("Wage", 1000.0, IncomeKind::Active).with_id("w")];
    let expenses = vec![
        ExpenseRecord::new("Rent", 900.0, ExpenseCategory::Living).with_id("rent"),
        ExpenseRecord::new("Holiday", 600.0, ExpenseCategory::Flexible).with_id("trip"),
    ];
    let g = layout(&income, &expenses);

    assert_eq!(g.surplus, -500.0);
    assert!(g.node(SURPLUS_ID).is_none());

    let deficit: Vec<_> = g.nodes_of_kind(NodeKind::Deficit).collect();
    assert_eq!(deficit.len(), 2);
    assert_eq!(g.node(DEFICIT_SOURCE_ID).unwrap().column, 0);
    assert_eq!(g.node(DEFICIT_AGGREGATE_ID).unwrap().column, 1);

    let into_total = g
        .incoming(TOTAL_ID)
        .find(|l| l.source_id == DEFICIT_AGGREGATE_ID)
        .expect("deficit link into total");
    assert_eq!(into_total.value, 500.0);
    assert_eq!(into_total.kind, LinkKind::Deficit);

    let inflow: f64 = g.incoming(TOTAL_ID).map(|l| l.value).sum();
    let outflow: f64 = g.outgoing(TOTAL_ID).map(|l| l.value).sum();
    assert_eq!(inflow, 1500.0);
    assert_eq!(outflow, 1500.0);

    assert_well_formed(&g);
    assert_flow_conserved(&g);
}

#[test]
fn balanced_month_keeps_a_zero_surplus_flow() {
    let income = vec![IncomeRecord::new("Wage", 800.0, IncomeKind::Active)];
    let expenses = vec![ExpenseRecord::new("Rent", 800.0, ExpenseCategory::Living)];
    let g = layout(&income, &expenses);
    assert_eq!(g.surplus, 0.0);

    let surplus = g.node(SURPLUS_ID).expect("surplus leaf");
    assert_eq!(surplus.value, 0.0);
    assert_eq!(surplus.height, 0.0);
    assert_eq!(surplus.column, 4);
    let link = g
        .outgoing(TOTAL_ID)
        .find(|l| l.target_id == SURPLUS_ID)
        .expect("surplus link");
    assert_eq!(link.value, 0.0);
    assert_eq!(link.kind, LinkKind::Surplus);

    assert_eq!(g.nodes_of_kind(NodeKind::Deficit).count(), 0);
    assert_well_formed(&g);
    assert_flow_conserved(&g);
}

#[test]
fn overflowing_totals_are_rejected_and_fall_back_to_empty() {
    let income = vec![
        IncomeRecord::new("A", 1e308, IncomeKind::Active),
        IncomeRecord::new("B", 1e308, IncomeKind::Passive),
    ];
    let expenses = vec![
        ExpenseRecord::new("C", 1e308, ExpenseCategory::Living),
        ExpenseRecord::new("D", 1e308, ExpenseCategory::Flexible),
    ];
    let config = LayoutConfig::default();
    let offsets = ColumnOffsets::default();

    let err = layout_cash_flow(&income, &expenses, surface(), &offsets, &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Input(cashflow_core::Error::TotalOverflow { .. })
    ));

    let g = layout_or_empty(&income, &expenses, surface(), &offsets, &config);
    assert!(g.is_empty());
    assert_eq!(g.total_income, 0.0);
    assert!(g.surplus.is_finite());
}

#[test]
fn expenses_without_income_leave_income_columns_to_the_deficit() {
    let expenses = vec![ExpenseRecord::new("Rent", 700.0, ExpenseCategory::Living)];
    let g = layout(&[], &expenses);
    assert_eq!(g.nodes_of_kind(NodeKind::Source).count(), 0);
    assert_eq!(g.nodes_of_kind(NodeKind::Aggregate).count(), 0);
    assert_eq!(g.node(DEFICIT_SOURCE_ID).unwrap().value, 700.0);
    assert_well_formed(&g);
    assert_flow_conserved(&g);
}

#[test]
fn income_without_expenses_flows_entirely_to_surplus() {
    let income = vec![IncomeRecord::new("Wage", 300.0, IncomeKind::Active)];
    let g = layout(&income, &[]);
    assert_eq!(g.nodes_of_kind(NodeKind::Category).count(), 0);
    assert_eq!(g.nodes_of_kind(NodeKind::Leaf).count(), 0);
    assert_eq!(g.node(SURPLUS_ID).unwrap().value, 300.0);
    assert_well_formed(&g);
}

#[test]
fn zero_valued_records_yield_zero_height_nodes() {
    let income = vec![IncomeRecord::new("Nothing", 0.0, IncomeKind::Passive)];
    let expenses = vec![ExpenseRecord::new("Free", 0.0, ExpenseCategory::Flexible)];
    let g = layout(&income, &expenses);
    assert!(!g.nodes.is_empty());
    for n in &g.nodes {
        assert_eq!(n.height, 0.0, "{}", n.id);
    }
    for l in &g.links {
        assert_eq!(l.thickness, 0.0);
    }
    assert_well_formed(&g);
}

#[test]
fn aggregates_follow_fixed_order_and_records_keep_first_seen_order() {
    let flow = CashFlow::sample();
    let g = layout(&flow.income, &flow.expenses);

    let types: Vec<_> = g.nodes_in_column(1).map(|n| n.id.clone()).collect();
    assert_eq!(
        types,
        vec![type_node_id(IncomeKind::Active), type_node_id(IncomeKind::Passive)]
    );

    let categories: Vec<_> = g.nodes_in_column(3).map(|n| n.label.clone()).collect();
    assert_eq!(
        categories,
        vec![
            "Payroll Deductions",
            "Living Costs",
            "Long-Term Planning",
            "Flexible Spending"
        ]
    );

    let mut leaves: Vec<_> = g.nodes_in_column(4).collect();
    leaves.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
    let labels: Vec<_> = leaves.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels.first(), Some(&"Federal Tax"));
    assert_eq!(labels.last(), Some(&"Surplus"));
    assert_eq!(labels[2], "Utilities & Bills");

    assert_well_formed(&g);
    assert_flow_conserved(&g);
}

#[test]
fn sources_are_grouped_under_their_type() {
    let income = vec![
        IncomeRecord::new("Interest", 10.0, IncomeKind::Passive).with_id("i"),
        IncomeRecord::new("Wage", 100.0, IncomeKind::Active).with_id("w"),
        IncomeRecord::new("Bonus", 50.0, IncomeKind::Active).with_id("b"),
    ];
    let g = layout(&income, &[]);
    let mut sources: Vec<_> = g.nodes_in_column(0).collect();
    sources.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
    let ids: Vec<_> = sources.iter().map(|n| n.id.clone()).collect();
    assert_eq!(
        ids,
        vec![income_node_id("w"), income_node_id("b"), income_node_id("i")]
    );
}

#[test]
fn node_height_grows_with_value_within_a_column() {
    let flow = CashFlow::sample();
    let g = layout(&flow.income, &flow.expenses);
    for column in 0..5 {
        let nodes: Vec<_> = g.nodes_in_column(column).collect();
        for a in &nodes {
            for b in &nodes {
                if a.value > b.value {
                    assert!(a.height > b.height, "{} vs {}", a.id, b.id);
                }
            }
        }
    }
}

#[test]
fn link_bands_fill_the_total_node() {
    let flow = CashFlow::sample();
    let g = layout(&flow.income, &flow.expenses);
    let total = g.node(TOTAL_ID).unwrap();
    let out: f64 = g.outgoing(TOTAL_ID).map(|l| l.thickness).sum();
    let inn: f64 = g.incoming(TOTAL_ID).map(|l| l.thickness).sum();
    assert!(approx_eq(out, total.height));
    assert!(approx_eq(inn, total.height));
}

#[test]
fn columns_are_evenly_spaced_and_span_the_surface() {
    let flow = CashFlow::sample();
    let g = layout(&flow.income, &flow.expenses);
    let xs: Vec<f64> = (0..5)
        .map(|c| g.nodes_in_column(c).next().unwrap().x)
        .collect();
    let spacing = xs[1] - xs[0];
    for pair in xs.windows(2) {
        assert!(approx_eq(pair[1] - pair[0], spacing));
    }
    assert!(xs[0] > 0.0);
    let right = g.nodes_in_column(4).next().unwrap().right();
    assert!(right < g.width && right > g.width * 0.9);
    assert!(g.node_width < spacing);
}

#[test]
fn column_offsets_shift_whole_columns() {
    let flow = CashFlow::sample();
    let cfg = LayoutConfig::default();
    let neutral = layout(&flow.income, &flow.expenses);
    let offsets = ColumnOffsets::new([0.0, 0.0, 30.0, 0.0, 0.0]);
    let moved = layout_cash_flow(&flow.income, &flow.expenses, surface(), &offsets, &cfg).unwrap();

    for (a, b) in neutral.nodes.iter().zip(&moved.nodes) {
        assert_eq!(a.id, b.id);
        let expected = if a.column == 2 { 30.0 } else { 0.0 };
        assert!(approx_eq(b.x - a.x, expected), "{}", a.id);
        assert_eq!(a.y, b.y);
    }
    let total = moved.node(TOTAL_ID).unwrap();
    for l in moved.incoming(TOTAL_ID) {
        assert!(approx_eq(l.target_anchor_x, total.x));
    }
}

#[test]
fn out_of_bounds_offsets_are_clamped_by_the_engine() {
    let flow = CashFlow::sample();
    let cfg = LayoutConfig::default();
    let neutral = layout(&flow.income, &flow.expenses);
    let offsets = ColumnOffsets::new([-50.0, 1e6, f64::NAN, -1e6, 50.0]);
    let moved = layout_cash_flow(&flow.income, &flow.expenses, surface(), &offsets, &cfg).unwrap();

    let shift = |column: usize| {
        let a = neutral.nodes_in_column(column).next().unwrap().x;
        let b = moved.nodes_in_column(column).next().unwrap().x;
        b - a
    };
    assert!(approx_eq(shift(0), 0.0));
    assert!(approx_eq(shift(1), 70.0));
    assert!(approx_eq(shift(2), 0.0));
    assert!(approx_eq(shift(3), -70.0));
    assert!(approx_eq(shift(4), 0.0));
}

#[test]
fn maximal_opposing_drags_never_overlap_adjacent_columns() {
    let flow = CashFlow::sample();
    let cfg = LayoutConfig::default();
    for width in [200.0, 700.0, 1600.0] {
        let limit = width * cfg.max_drag_ratio;
        for left in 0..4 {
            let mut values = [0.0; 5];
            values[left] = limit;
            values[left + 1] = -limit;
            let g = layout_cash_flow(
                &flow.income,
                &flow.expenses,
                Surface::new(width, 400.0),
                &ColumnOffsets::new(values),
                &cfg,
            )
            .unwrap();
            let right_edge = g
                .nodes_in_column(left)
                .map(|n| n.right())
                .fold(f64::MIN, f64::max);
            let next_left = g
                .nodes_in_column(left + 1)
                .map(|n| n.x)
                .fold(f64::MAX, f64::min);
            assert!(
                right_edge < next_left,
                "width {width}: column {left} reaches {right_edge}, next starts {next_left}"
            );
        }
    }
}

#[test]
fn tiny_surfaces_are_clamped_to_the_floor() {
    let flow = CashFlow::sample();
    let cfg = LayoutConfig::default();
    let g = layout_cash_flow(
        &flow.income,
        &flow.expenses,
        Surface::new(10.0, 5.0),
        &ColumnOffsets::default(),
        &cfg,
    )
    .unwrap();
    assert_eq!(g.width, cfg.min_surface_width);
    assert_eq!(g.height, cfg.min_surface_height);
    assert_well_formed(&g);
}

#[test]
fn many_records_shrink_gaps_but_stay_inside_the_surface() {
    let expenses: Vec<_> = (0..200)
        .map(|i| ExpenseRecord::new(format!("Item {i}"), 1.0 + i as f64, ExpenseCategory::Living))
        .collect();
    let income = vec![IncomeRecord::new("Wage", 50_000.0, IncomeKind::Active)];
    let g = layout(&income, &expenses);
    assert!(g.node_gap < LayoutConfig::default().node_gap);
    assert_well_formed(&g);
    assert_flow_conserved(&g);
}

#[test]
fn layout_is_deterministic() {
    let flow = CashFlow::sample();
    let a = layout(&flow.income, &flow.expenses);
    let b = layout(&flow.income, &flow.expenses);
    assert_eq!(a, b);
}

#[test]
fn invalid_records_are_errors_and_fall_back_to_empty() {
    let income = vec![IncomeRecord::new("Wage", -5.0, IncomeKind::Active)];
    let cfg = LayoutConfig::default();
    let err = layout_cash_flow(&income, &[], surface(), &ColumnOffsets::default(), &cfg)
        .unwrap_err();
    assert!(matches!(err, Error::Input(_)), "{err}");

    let g = layout_or_empty(&income, &[], surface(), &ColumnOffsets::default(), &cfg);
    assert!(g.is_empty());
    assert_eq!(g.total_income, 0.0);
    assert_eq!(g.surplus, 0.0);
    assert_eq!(g.width, 700.0);
}

#[test]
fn non_finite_surface_is_an_error_with_default_sized_fallback() {
    let (income, expenses) = wage_and_tax();
    let cfg = LayoutConfig::default();
    let bad = Surface::new(f64::NAN, 400.0);
    let err = layout_cash_flow(&income, &expenses, bad, &ColumnOffsets::default(), &cfg)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSurface { .. }), "{err}");

    let g = layout_or_empty(&income, &expenses, bad, &ColumnOffsets::default(), &cfg);
    assert!(g.is_empty());
    assert_eq!(g.width, cfg.default_surface_width);
    assert!(g.node_width.is_finite());
}

#[test]
fn geometry_serializes_with_camel_case_fields() {
    let (income, expenses) = wage_and_tax();
    let g = layout(&income, &expenses);
    let v = serde_json::to_value(&g).unwrap();
    assert!(v.get("nodeWidth").is_some());
    assert!(v.get("totalIncome").is_some());
    let link = &v["links"][0];
    assert!(link.get("sourceAnchorX").is_some());
    assert_eq!(v["nodes"][0]["kind"], "source");
}
